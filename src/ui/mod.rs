pub mod board_form;
pub mod board_view;
pub mod config_form;
pub mod input;
pub mod sidebar;
