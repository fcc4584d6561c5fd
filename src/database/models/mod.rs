pub mod contact;
pub mod gender;

pub use contact::Contact;
pub use gender::{
    Deleted, Gender, GenderChanges, GenderRow, GenderSummary, GenderType, GenderTypeOption,
    NewGender, UnknownGenderType,
};
