mod config;
mod response;
