use log::debug;
use uuid::Uuid;

use discograph_core::ports::{
  ArtistRecord, CreditRecord, LabelRecord, ReleaseGroupRecord, ReleaseRecord,
};

use crate::dto::{
  ArtistCreditDto, ArtistDto, ArtistSearchDto, LabelInfoDto, ReleaseDto, ReleaseGroupDto,
  ReleaseSearchDto,
};

/// MusicBrainz ids are UUIDs. Anything else is malformed and never reaches a
/// follow-up query.
pub fn is_mbid(id: &str) -> bool {
  Uuid::parse_str(id).is_ok()
}

fn mbid(id: Option<String>) -> Option<String> {
  let id = id?;
  if is_mbid(&id) {
    Some(id)
  } else {
    debug!("dropping record with malformed id {id:?}");
    None
  }
}

fn text(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

pub fn artist(dto: ArtistDto) -> Option<ArtistRecord> {
  Some(ArtistRecord {
    id: mbid(dto.id)?,
    name: text(dto.name)?,
    country: text(dto.country),
    gender: text(dto.gender),
  })
}

fn release_group(dto: ReleaseGroupDto) -> Option<ReleaseGroupRecord> {
  Some(ReleaseGroupRecord {
    id: mbid(dto.id)?,
    title: text(dto.title)?,
    primary_type: text(dto.primary_type),
  })
}

fn label(dto: LabelInfoDto) -> Option<LabelRecord> {
  let label = dto.label?;
  Some(LabelRecord { id: mbid(label.id)?, name: text(label.name)? })
}

fn credit(dto: ArtistCreditDto) -> Option<CreditRecord> {
  let artist = dto.artist?;
  let name = text(artist.name).or_else(|| text(dto.name))?;
  Some(CreditRecord { id: mbid(artist.id)?, name })
}

pub fn release(dto: ReleaseDto) -> Option<ReleaseRecord> {
  Some(ReleaseRecord {
    id: mbid(dto.id)?,
    title: text(dto.title)?,
    release_group: dto.release_group.and_then(release_group),
    labels: dto.label_info.unwrap_or_default().into_iter().filter_map(label).collect(),
    credits: dto.artist_credit.unwrap_or_default().into_iter().filter_map(credit).collect(),
  })
}

pub fn artists(dto: ArtistSearchDto) -> Vec<ArtistRecord> {
  dto.artists.unwrap_or_default().into_iter().filter_map(artist).collect()
}

pub fn releases(dto: ReleaseSearchDto) -> Vec<ReleaseRecord> {
  dto.releases.unwrap_or_default().into_iter().filter_map(release).collect()
}
