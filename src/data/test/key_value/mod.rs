use crate::{data::key_value::KeyValueRepository, error::AppError};
use sea_orm::DbErr;
use test_utils::{builder::TestBuilder, factory};

mod get;
mod json;
mod set;
