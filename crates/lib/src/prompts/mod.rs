//! # Prompt Template Modules
//!
//! This module organizes the prompt templates used by the `askdb` library.
//! The defaults can be overridden per deployment through the server's task
//! configuration.

pub mod tasks;
