mod auth;
mod config;
mod notifications;
