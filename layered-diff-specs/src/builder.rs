//! Building the study documents a fixture describes.

use std::collections::HashMap;

use layered_diff::{Annotation, AnnotationId, Document, GroupedRevisions, Value};
use tracing::debug;

use crate::errors::{SpecError, SpecResult};
use crate::fixture::{
    FeatureSpec, RecordSpec, RevisionSpec, StudyFixture, LINK_ROLE, LINK_TARGET, LINK_TYPE,
};

/// Build every group's revisions, in fixture order.
pub fn build_study(fixture: &StudyFixture) -> SpecResult<GroupedRevisions> {
    let mut revisions = GroupedRevisions::new();
    for group in &fixture.groups {
        let mut documents = Vec::with_capacity(group.revisions.len());
        for (index, revision) in group.revisions.iter().enumerate() {
            let document = build_revision(fixture, revision).map_err(|message| {
                SpecError::Fixture {
                    message: format!("group {:?} revision {index}: {message}", group.name),
                }
            })?;
            documents.push(document);
        }
        if revisions.insert(group.name.clone(), documents).is_some() {
            return Err(SpecError::Fixture {
                message: format!("group {:?} is declared twice", group.name),
            });
        }
    }
    debug!(groups = revisions.len(), "built study");
    Ok(revisions)
}

type Ids = HashMap<String, AnnotationId>;

fn build_revision(fixture: &StudyFixture, spec: &RevisionSpec) -> Result<Option<Document>, String> {
    if spec.absent {
        if spec.tokenize.is_some() || spec.tags.is_some() || !spec.records.is_empty() {
            return Err("an absent revision cannot carry annotations".to_string());
        }
        return Ok(None);
    }

    let text = spec.text.as_deref().unwrap_or(&fixture.text);
    let mut builder = Document::builder(text);
    let mut ids = Ids::new();

    match (&spec.tokenize, &spec.tags) {
        (Some(token_type), tags) => {
            let tokens = builder.tokenize(token_type);
            if let Some(tags) = tags {
                if tags.values.len() != tokens.len() {
                    return Err(format!(
                        "{} tags for {} tokens",
                        tags.values.len(),
                        tokens.len()
                    ));
                }
                for (&token, value) in tokens.iter().zip(&tags.values) {
                    let range = builder
                        .annotation(token)
                        .and_then(Annotation::range)
                        .ok_or_else(|| format!("token {token} has no range"))?;
                    builder.add(
                        Annotation::span(&tags.type_name, range.begin, range.end)
                            .with(tags.feature.as_str(), value.as_str()),
                    );
                }
            }
            for (index, token) in tokens.into_iter().enumerate() {
                ids.insert(format!("tok{index}"), token);
            }
        }
        (None, Some(_)) => return Err("tags need tokenize".to_string()),
        (None, None) => {}
    }

    // Records first so references may point forward.
    let mut added = Vec::with_capacity(spec.records.len());
    for record in &spec.records {
        let id = builder.add(scalar_annotation(record, text.len())?);
        if let Some(key) = &record.id {
            if ids.insert(key.clone(), id).is_some() {
                return Err(format!("record id {key:?} is used twice"));
            }
        }
        added.push((id, record));
    }

    for (id, record) in added {
        for (name, feature) in &record.features {
            let value = match feature {
                FeatureSpec::Ref { id: key } => Value::Record(lookup(&ids, key)?),
                FeatureSpec::Refs { refs } => Value::Records(
                    refs.iter()
                        .map(|key| lookup(&ids, key))
                        .collect::<Result<_, _>>()?,
                ),
                FeatureSpec::Links { links } => {
                    let mut link_ids = Vec::with_capacity(links.len());
                    for link in links {
                        let mut annotation =
                            Annotation::record(LINK_TYPE).with(LINK_ROLE, link.role.as_str());
                        if let Some(target) = &link.target {
                            annotation = annotation.with(LINK_TARGET, lookup(&ids, target)?);
                        }
                        link_ids.push(builder.add(annotation));
                    }
                    Value::Records(link_ids)
                }
                _ => continue,
            };
            builder.set(id, name.as_str(), value);
        }
    }

    Ok(Some(builder.build()))
}

fn scalar_annotation(record: &RecordSpec, text_len: usize) -> Result<Annotation, String> {
    let mut annotation = match (record.begin, record.end) {
        (Some(begin), Some(end)) if begin <= end && end <= text_len => {
            Annotation::span(&record.type_name, begin, end)
        }
        (Some(begin), Some(end)) => {
            return Err(format!(
                "{} span {begin}-{end} is outside the text (length {text_len})",
                record.type_name
            ))
        }
        (None, None) => Annotation::record(&record.type_name),
        _ => return Err(format!("{} needs both begin and end", record.type_name)),
    };
    for (name, feature) in &record.features {
        let value = match feature {
            FeatureSpec::Bool(v) => Value::Bool(*v),
            FeatureSpec::Int(v) => Value::Int(*v),
            FeatureSpec::Float(v) => Value::Float(*v),
            FeatureSpec::Str(v) => Value::Str(v.clone()),
            _ => continue,
        };
        annotation = annotation.with(name.as_str(), value);
    }
    Ok(annotation)
}

fn lookup(ids: &Ids, key: &str) -> Result<AnnotationId, String> {
    ids.get(key)
        .copied()
        .ok_or_else(|| format!("unknown record id {key:?}"))
}
