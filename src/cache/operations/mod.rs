pub mod booking;
pub mod captcha;
pub mod kv;
