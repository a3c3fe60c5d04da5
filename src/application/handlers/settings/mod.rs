//! Settings handlers - admin guided flows for gate configuration.

mod apply_setting;
mod begin_setting;

pub use apply_setting::ApplySettingHandler;
pub use begin_setting::BeginSettingHandler;
