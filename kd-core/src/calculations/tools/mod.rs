//! One module per calculator tool.
//!
//! | Module             | Tag              | Computes |
//! |--------------------|------------------|----------|
//! | `area_ratio`       | `emsal`          | Buildable area, footprint, floor estimate |
//! | `unit_mix`         | `daire`          | Saleable area, unit count, per-type counts |
//! | `cost_band`        | `maliyet`        | Low / mid / high construction cost |
//! | `revenue_share`    | `paylasim`       | Owner / contractor unit and value split |
//! | `rent_assistance`  | `destek`         | Monthly and total rent support |
//! | `timeline`         | `takvim`         | Remaining phases and month range |
//! | `land_share`       | `arsapayi`       | Per-unit land share |
//! | `mini_feasibility` | `muteahhit-mini` | Contractor revenue, cost and margin |

pub mod area_ratio;
pub mod cost_band;
pub mod land_share;
pub mod mini_feasibility;
pub mod rent_assistance;
pub mod revenue_share;
pub mod timeline;
pub mod unit_mix;
