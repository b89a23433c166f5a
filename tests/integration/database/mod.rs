//! Postgres repository tests
//!
//! Run only when `TEST_DATABASE_URL` points at a disposable database.

mod repository_test;
