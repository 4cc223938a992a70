pub mod age;
pub mod form;
pub mod person;
pub mod statement;
pub mod validation;
