// ABOUTME: Library module for mysql-json-cli
// ABOUTME: Exports settings, document model, MySQL access, export/import and the menu

pub mod config;
pub mod console;
pub mod document;
pub mod error;
pub mod export;
pub mod import;
pub mod menu;
pub mod mysql;
pub mod utils;
