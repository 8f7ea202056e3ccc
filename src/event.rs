use chrono::{DateTime, Utc};

/// A concrete occurrence taken from a VEVENT block
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub uid: String,
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

impl Event {
    /// End of the event, an event without one lasts zero time
    pub fn effective_end(&self) -> DateTime<Utc> {
        self.end.unwrap_or(self.start)
    }
}

/// One top-level component of a calendar feed
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Event(Event),
    Todo { uid: String },
    Journal { uid: String },
    FreeBusy { uid: String },
    Timezone { tzid: String },
}

impl Component {
    pub fn as_event(&self) -> Option<&Event> {
        match self {
            Component::Event(event) => Some(event),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Component::Event(_) => "VEVENT",
            Component::Todo { .. } => "VTODO",
            Component::Journal { .. } => "VJOURNAL",
            Component::FreeBusy { .. } => "VFREEBUSY",
            Component::Timezone { .. } => "VTIMEZONE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(end: Option<DateTime<Utc>>) -> Event {
        Event {
            uid: String::from("a"),
            summary: String::from("foo"),
            start: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
            end,
            location: None,
        }
    }

    #[test]
    fn missing_end_means_zero_duration() {
        let e = event(None);
        assert_eq!(e.effective_end(), e.start);

        let end = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        assert_eq!(event(Some(end)).effective_end(), end);
    }

    #[test]
    fn only_events_narrow() {
        let e = Component::Event(event(None));
        assert!(e.as_event().is_some());
        assert_eq!(e.kind(), "VEVENT");

        let tz = Component::Timezone {
            tzid: String::from("Asia/Taipei"),
        };
        assert!(tz.as_event().is_none());
        assert_eq!(tz.kind(), "VTIMEZONE");
    }
}
