pub mod command;
pub mod http_json;
pub mod key_value;
pub mod sequence;

pub use command::CommandAdapter;
pub use http_json::HttpJsonAdapter;
pub use key_value::KeyValueAdapter;
pub use sequence::SequenceAdapter;
