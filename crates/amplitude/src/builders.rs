//! Fluent setters for events and identify records.

use crate::types::{Event, Identify, Properties};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Get current timestamp in milliseconds.
fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

fn insert(map: &mut Option<Properties>, key: impl Into<String>, value: impl Into<Value>) {
    map.get_or_insert_with(Properties::new)
        .insert(key.into(), value.into());
}

macro_rules! string_setters {
    ($($field:ident),* $(,)?) => {
        $(
            #[doc = concat!("Set `", stringify!($field), "`.")]
            pub fn $field(mut self, value: impl Into<String>) -> Self {
                self.$field = Some(value.into());
                self
            }
        )*
    };
}

// ============================================
// EVENT
// ============================================

impl Event {
    /// Create an event of the given type.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: Some(event_type.into()),
            ..Default::default()
        }
    }

    string_setters!(
        adid,
        app_version,
        carrier,
        city,
        country,
        device_brand,
        device_id,
        device_manufacturer,
        device_model,
        device_type,
        dma,
        event_type,
        ifda,
        insert_id,
        ip,
        language,
        os_name,
        os_version,
        paying,
        platform,
        product_id,
        region,
        revenue_type,
        start_version,
        user_id,
    );

    /// Set the event location.
    pub fn location(mut self, lat: impl Into<String>, lng: impl Into<String>) -> Self {
        self.location_lat = Some(lat.into());
        self.location_lng = Some(lng.into());
        self
    }

    /// Set the client-side event id.
    pub fn event_id(mut self, id: i64) -> Self {
        self.event_id = Some(id);
        self
    }

    /// Set the session id (session start, milliseconds since epoch).
    pub fn session_id(mut self, id: i64) -> Self {
        self.session_id = Some(id);
        self
    }

    /// Set the event time (milliseconds since epoch).
    pub fn time(mut self, ts: i64) -> Self {
        self.time = Some(ts);
        self
    }

    /// Set the event time to now.
    pub fn timestamp_now(self) -> Self {
        self.time(now_ms())
    }

    /// Set the price.
    pub fn price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Set the quantity.
    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Set the revenue.
    pub fn revenue(mut self, revenue: f64) -> Self {
        self.revenue = Some(revenue);
        self
    }

    /// Add an event property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        insert(&mut self.event_properties, key, value);
        self
    }

    /// Add a user property.
    pub fn user_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        insert(&mut self.user_properties, key, value);
        self
    }

    /// Add a group membership.
    pub fn group(mut self, group_type: impl Into<String>, value: impl Into<Value>) -> Self {
        insert(&mut self.groups, group_type, value);
        self
    }
}

// ============================================
// IDENTIFY
// ============================================

impl Identify {
    /// Create an empty identify update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an identify update for a user id.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self::new().user_id(user_id)
    }

    string_setters!(
        app_version,
        carrier,
        city,
        country,
        device_brand,
        device_id,
        device_manufacturer,
        device_model,
        device_type,
        dma,
        language,
        os_name,
        os_version,
        paying,
        platform,
        region,
        start_version,
        user_id,
    );

    /// Add a user property.
    pub fn user_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        insert(&mut self.user_properties, key, value);
        self
    }

    /// Add a group membership.
    pub fn group(mut self, group_type: impl Into<String>, value: impl Into<Value>) -> Self {
        insert(&mut self.groups, group_type, value);
        self
    }
}
