use std::{
    fs::{self, FileTimes},
    path::Path,
};

use id3::{Tag, TagLike, Timestamp, frame::Comment};

use super::{TagComment, TagError, TagFields, TagStore};

const COMMENT_LANG: &str = "eng";

/// [`TagStore`] backed by the ID3 tag of mp3 files.
#[derive(Debug, Default, Clone, Copy)]
pub struct Id3TagStore;

impl Id3TagStore {
    pub fn new() -> Self {
        Self
    }
}

impl TagStore for Id3TagStore {
    fn read(&self, path: &Path) -> Result<TagFields, TagError> {
        let tag = read_tag(path)?;

        Ok(TagFields {
            artist: tag.artist().map(str::to_string),
            album_artist: tag.album_artist().map(str::to_string),
            album: tag.album().map(str::to_string),
            title: tag.title().map(str::to_string),
            genre: tag.genre_parsed().map(|g| g.into_owned()),
            comments: tag
                .comments()
                .map(|c| TagComment {
                    description: c.description.clone(),
                    text: c.text.clone(),
                })
                .collect(),
            recording_date: tag.date_recorded().map(|d| d.to_string()),
            original_release_date: tag.original_date_released().map(|d| d.to_string()),
        })
    }

    fn write(&self, path: &Path, fields: &TagFields) -> Result<(), TagError> {
        let mut tag = read_tag(path)?;

        if let Some(artist) = &fields.artist {
            tag.set_artist(artist.as_str());
        }
        if let Some(album_artist) = &fields.album_artist {
            tag.set_album_artist(album_artist.as_str());
        }
        if let Some(album) = &fields.album {
            tag.set_album(album.as_str());
        }
        if let Some(title) = &fields.title {
            tag.set_title(title.as_str());
        }
        if let Some(genre) = &fields.genre {
            tag.set_genre(genre.as_str());
        }
        if let Some(date) = &fields.recording_date {
            tag.set_date_recorded(parse_timestamp(date)?);
        }
        if let Some(date) = &fields.original_release_date {
            tag.set_original_date_released(parse_timestamp(date)?);
        }

        for comment in &fields.comments {
            let exists = tag
                .comments()
                .any(|c| c.description == comment.description);
            if !exists {
                tag.add_frame(Comment {
                    lang: COMMENT_LANG.to_string(),
                    description: comment.description.clone(),
                    text: comment.text.clone(),
                });
            }
        }

        let metadata = fs::metadata(path).map_err(|source| TagError::Times {
            path: path.to_path_buf(),
            source,
        })?;

        tag.write_to_path(path, tag.version())
            .map_err(|e| TagError::Write {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        restore_times(path, &metadata)
    }
}

fn read_tag(path: &Path) -> Result<Tag, TagError> {
    Tag::read_from_path(path).map_err(|e| match e.kind {
        id3::ErrorKind::NoTag => TagError::NoTag(path.to_path_buf()),
        _ => TagError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    })
}

fn parse_timestamp(value: &str) -> Result<Timestamp, TagError> {
    value
        .parse::<Timestamp>()
        .map_err(|_| TagError::InvalidDate(value.to_string()))
}

fn restore_times(path: &Path, before: &fs::Metadata) -> Result<(), TagError> {
    let times_err = |source| TagError::Times {
        path: path.to_path_buf(),
        source,
    };

    let mut times = FileTimes::new();
    if let Ok(modified) = before.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = before.accessed() {
        times = times.set_accessed(accessed);
    }

    let file = fs::File::options()
        .write(true)
        .open(path)
        .map_err(times_err)?;
    file.set_times(times).map_err(times_err)
}
