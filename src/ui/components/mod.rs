pub mod chat_area;
pub mod input_bar;
pub mod loader;
pub mod login_form;
pub mod sidebar;
