mod category;
mod common;
mod event;
mod payment;
mod ticket;
mod user;

pub use category::*;
pub use common::parse_event_date;
pub(crate) use common::{Listing, Single};
pub use event::*;
pub use payment::*;
pub use ticket::*;
pub use user::*;
pub(crate) use user::{LoginRequest, LoginResponse};
