pub mod card;
pub mod charts;
pub mod money;
pub mod popup;
pub mod tabs;
pub mod toast;
