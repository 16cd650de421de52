mod ans;
pub mod layout;
mod sns;

pub use ans::AnsNameService;
pub use layout::RegistryLayout;
pub use sns::SnsNameService;
