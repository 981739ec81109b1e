mod booking;
mod error;
mod event;
mod status;

pub mod dtos {
    pub use crate::booking::dtos::*;
    pub use crate::event::dtos::*;
}

pub use crate::booking::api::*;
pub use crate::error::APIErrorResponse;
pub use crate::event::api::*;
pub use crate::status::api::*;
