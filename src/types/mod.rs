//! Value types shared by the registry and the bulb transport.

mod brightness;
mod power;
mod scene;

pub use brightness::Brightness;
pub use power::PowerState;
pub use scene::SceneMode;
