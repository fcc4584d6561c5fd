pub mod gender_service;

pub use gender_service::{
    AccountContext, CreateGenderRequest, GenderError, GenderService, UpdateGenderRequest,
};
