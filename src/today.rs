use crate::event::Event;
use crate::feed::Feed;
use chrono::prelude::*;
use chrono_tz::Tz;
use tracing::debug;

/// Calendar date of `instant` as seen in `tz`
pub fn civil_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

pub fn today(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    civil_date(now, tz)
}

/// Whether any part of the event falls on `day`, dates taken in `tz`
pub fn occurs_on(event: &Event, day: NaiveDate, tz: Tz) -> bool {
    civil_date(event.start, tz) <= day && day <= civil_date(event.effective_end(), tz)
}

/// Events of the feed that fall on `day`, in feed order
pub fn events_on(feed: &Feed, day: NaiveDate, tz: Tz) -> Vec<&Event> {
    feed.events()
        .filter(|event| {
            let hit = occurs_on(event, day, tz);
            debug!(uid = %event.uid, summary = %event.summary, hit, "Checked event against {}", day);
            hit
        })
        .collect()
}

pub fn events_today(feed: &Feed, tz: Tz, now: DateTime<Utc>) -> Vec<&Event> {
    events_on(feed, today(now, tz), tz)
}
