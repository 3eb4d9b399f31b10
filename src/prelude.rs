//! Prelude

pub use crate::hal::prelude::*;
pub use crate::rcu::RcuExt as _gd32f1x0_hal_rcu_RcuExt;
pub use crate::time::U32Ext as _gd32f1x0_hal_time_U32Ext;
