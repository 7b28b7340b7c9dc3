//! Endpoint-specific API implementations
//!
//! | Module | Backend resource | Description |
//! |--------|------------------|-------------|
//! | `events` | `/rest/v1/<events_table>` | Geo-tagged events (PostgREST) |

pub mod events;

pub use events::{EndpointStatus, EventsApi};
