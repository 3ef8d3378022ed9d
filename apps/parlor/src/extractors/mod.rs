pub mod current_user;
pub mod game_id;

pub use current_user::CurrentUser;
pub use game_id::GamePath;
