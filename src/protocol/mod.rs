//! Wire protocol for relay connections

pub mod request;

pub use request::{
    read_request_head, Endpoint, RequestHead, CAPTURE_PATH, STREAM_ID_HEADER, STREAM_PATH,
};
