mod confirm_dialog;
mod input;
mod key_result;
mod search_input;
mod user_form;

pub use confirm_dialog::{ConfirmDialog, ConfirmEvent};
pub use key_result::KeyResult;
pub use search_input::{SearchEvent, SearchInput};
pub use user_form::{FormEvent, FormSubmission, UserForm};
