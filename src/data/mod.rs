//! Backend access: base-URL resolution, the HTTP seam, and the two request cycles.

pub mod chat;
pub mod forecast;
pub mod locator;
pub mod transport;

pub use forecast::{ForecastResponse, fetch_forecast, load_forecast};
pub use locator::{PageLocation, RuntimeContext, api_base};
pub use transport::{HttpResponse, HttpTransport, Transport};
