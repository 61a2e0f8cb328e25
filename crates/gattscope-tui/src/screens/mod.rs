//! Screen registry.

pub mod inspector;
pub mod log;

use crate::component::Component;
use crate::screen::ScreenId;

/// All screens in tab order.
pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Inspector,
            Box::new(inspector::InspectorScreen::new()) as Box<dyn Component>,
        ),
        (ScreenId::Log, Box::new(log::LogScreen::new()) as Box<dyn Component>),
    ]
}
