use crate::emby_client::Session;

/// Filter value that selects every session.
pub const ALL_DEVICES: &str = "all";

/// A session matches `filter` when either its reported device id or its
/// internal device id equals it. No filter, or `"all"`, matches everything.
pub fn session_matches(session: &Session, filter: Option<&str>) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    if filter == ALL_DEVICES {
        return true;
    }

    session.device_id.as_deref() == Some(filter)
        || session.internal_device_id.as_deref().unwrap_or("") == filter
}

/// First session for `filter` that is currently playing something.
pub fn active_session<'a>(sessions: &'a [Session], filter: Option<&str>) -> Option<&'a Session> {
    sessions
        .iter()
        .filter(|session| session_matches(session, filter))
        .find(|session| session.is_playing())
}
