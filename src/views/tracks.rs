use serde_json::{json, Value};

use crate::emby_client::{MediaStream, NowPlayingItem, PlayState};

fn selected<'a>(
    item: &'a NowPlayingItem,
    kind: &'a str,
    index: Option<i32>,
) -> Option<&'a MediaStream> {
    let index = index?;
    item.streams_of(kind).find(|stream| stream.index == Some(index))
}

/// Label of the subtitle track being shown.
pub fn subtitle_label(item: &NowPlayingItem, play_state: &PlayState) -> String {
    if item.streams_of("Subtitle").next().is_none() {
        return "No subtitles".to_string();
    }

    let Some(track) = selected(item, "Subtitle", play_state.subtitle_stream_index) else {
        return "Off".to_string();
    };

    let language = track.language_label();
    let mut label = language.to_string();
    if let Some(title) = track.display_title.as_deref() {
        if !title.is_empty() && title != language {
            label = format!("{language} - {title}");
        }
    }
    if track.is_forced {
        label.push_str(" (Forced)");
    }
    if track.is_default {
        label.push_str(" (Default)");
    }
    label
}

/// Label of the audio track being played, falling back to the first one.
pub fn audio_label(item: &NowPlayingItem, play_state: &PlayState) -> String {
    let Some(first) = item.streams_of("Audio").next() else {
        return "No audio".to_string();
    };

    let Some(track) = selected(item, "Audio", play_state.audio_stream_index) else {
        return with_codec(first.language_label(), first.codec.as_deref());
    };

    let mut label = with_codec(track.language_label(), track.codec.as_deref());
    if let Some(channels) = track.channels.filter(|count| *count > 0) {
        match track.channel_layout.as_deref().filter(|layout| !layout.is_empty()) {
            Some(layout) => label.push_str(&format!(" {layout}")),
            None => label.push_str(&format!(" {channels}ch")),
        }
    }
    if track.is_default {
        label.push_str(" (Default)");
    }
    label
}

/// Every subtitle track of `item`, plus the one currently shown.
pub fn subtitle_attributes(item: &NowPlayingItem, play_state: &PlayState) -> Value {
    let index = play_state.subtitle_stream_index;
    let tracks: Vec<Value> = item
        .streams_of("Subtitle")
        .map(|stream| {
            json!({
                "index": stream.index,
                "language": stream.language_label(),
                "codec": stream.codec,
                "is_default": stream.is_default,
                "is_forced": stream.is_forced,
                "is_external": stream.is_external,
                "title": stream.display_title.as_deref().unwrap_or(""),
            })
        })
        .collect();
    let current = current_track(item, "Subtitle", index, &tracks);

    json!({
        "available_tracks": tracks,
        "track_count": tracks.len(),
        "current_index": index,
        "current_track": current,
        "has_subtitles": !tracks.is_empty(),
        "subtitles_enabled": index.is_some(),
    })
}

/// Every audio track of `item`, plus the one currently played.
pub fn audio_attributes(item: &NowPlayingItem, play_state: &PlayState) -> Value {
    let index = play_state.audio_stream_index;
    let tracks: Vec<Value> = item
        .streams_of("Audio")
        .map(|stream| {
            json!({
                "index": stream.index,
                "language": stream.language_label(),
                "codec": stream.codec,
                "channels": stream.channels,
                "channel_layout": stream.channel_layout,
                "bitrate": stream.bit_rate,
                "sample_rate": stream.sample_rate,
                "is_default": stream.is_default,
                "title": stream.display_title.as_deref().unwrap_or(""),
            })
        })
        .collect();
    let current = current_track(item, "Audio", index, &tracks);

    json!({
        "available_tracks": tracks,
        "track_count": tracks.len(),
        "current_index": index,
        "current_track": current,
        "has_audio": !tracks.is_empty(),
    })
}

fn current_track(
    item: &NowPlayingItem,
    kind: &str,
    index: Option<i32>,
    tracks: &[Value],
) -> Value {
    item.streams_of(kind)
        .position(|stream| index.is_some() && stream.index == index)
        .and_then(|position| tracks.get(position).cloned())
        .unwrap_or(Value::Null)
}

fn with_codec(language: &str, codec: Option<&str>) -> String {
    match codec.filter(|codec| !codec.is_empty()) {
        Some(codec) => format!("{language} ({})", codec.to_uppercase()),
        None => language.to_string(),
    }
}
