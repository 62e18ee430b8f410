//! Framer cloning and moot materialization.

use std::collections::HashSet;

use tracing::debug;

use crate::core::link::Link;
use crate::core::types::{FrameId, FramerId, Schedule};
use crate::error::{FramingError, FramingResult};
use crate::frame::{AuxLink, Frame, INSULAR_TAG, MootTag, Preact, RESERVED_FRAME_NAMES, Suspend, Transit};
use crate::framer::Framer;
use crate::house::House;

fn is_reserved_tag(tag: &str) -> bool {
    tag == INSULAR_TAG || RESERVED_FRAME_NAMES.contains(&tag)
}

impl House {
    /// Deep-copy an unresolved framer's frame tree under a new name.
    ///
    /// The clone shares no frames or acts with `original`; act parameters are
    /// copied and actor bodies shared. Frames keep their creation order and
    /// their authored names, so links inside the clone resolve within the
    /// clone's own namespace. Pending clone requests of the original are
    /// copied as requests, so nested clones are never shared.
    pub fn clone_framer(
        &mut self,
        original: FramerId,
        name: &str,
        tag: Option<&str>,
        insular: bool,
    ) -> FramingResult<FramerId> {
        let source = &self.framers[original.0];
        if source.resolved || source.pruned {
            return Err(FramingError::Clone(format!(
                "cannot clone framer '{}' after it is resolved",
                source.name()
            )));
        }
        if let Some(tag) = tag
            && is_reserved_tag(tag)
        {
            return Err(FramingError::Clone(format!("clone tag '{tag}' is reserved")));
        }
        let first = match &source.first {
            None => None,
            Some(Link::Unresolved(first)) => Some(Link::named(first.as_str())),
            Some(Link::Resolved(_)) => {
                return Err(FramingError::Clone(format!(
                    "first frame of '{}' is already resolved",
                    source.name()
                )));
            }
        };

        let mut framer = Framer::new(name, Schedule::Aux, source.period());
        framer.first = first;
        framer.original = false;
        framer.insular = insular;
        framer.tag = tag.map(str::to_string);
        framer.lineage = source.lineage.clone();
        framer.lineage.push(source.name().to_string());
        framer.human = source.human.clone();
        framer.count = source.count;
        let sources: Vec<FrameId> = source.frames().collect();

        let id = self.register_framer(framer)?;

        // First pass: copy frames with structural links kept as names.
        let mut copies = Vec::with_capacity(sources.len());
        for frame in &sources {
            let copy = self.copy_frame(*frame, id)?;
            copies.push(self.push_frame(id, copy)?);
        }

        // Second pass: relink overs and unders within the clone.
        for (frame, copy) in sources.iter().zip(&copies) {
            if let Some(over) = self.frames[frame.0].over {
                let over_name = self.frames[over.0].name.clone();
                let over_copy = self.framers[id.0].lookup(&over_name).ok_or_else(|| {
                    FramingError::Clone(format!("clone '{name}' lost frame '{over_name}'"))
                })?;
                self.frames[copy.0].over = Some(over_copy);
            }
            let unders: Vec<String> = self.frames[frame.0]
                .unders
                .iter()
                .map(|under| self.frames[under.0].name.clone())
                .collect();
            let mut relinked = Vec::with_capacity(unders.len());
            for under in unders {
                let under_copy = self.framers[id.0].lookup(&under).ok_or_else(|| {
                    FramingError::Clone(format!("clone '{name}' lost frame '{under}'"))
                })?;
                relinked.push(under_copy);
            }
            self.frames[copy.0].unders = relinked;
        }

        debug!(
            original = %self.framers[original.0].name(),
            clone = %name,
            tag = tag.unwrap_or(""),
            insular,
            "framer cloned"
        );
        Ok(id)
    }

    fn copy_frame(&self, id: FrameId, owner: FramerId) -> FramingResult<Frame> {
        let frame = &self.frames[id.0];
        let scope = || self.scope(id);
        // Acts are rebound to the copy's handle, which is the next arena slot.
        let target = FrameId(self.frames.len());

        let mut copy = Frame::new(frame.name.clone(), owner);
        copy.human = frame.human.clone();
        copy.count = frame.count;
        copy.next = match &frame.next {
            None => None,
            Some(Link::Unresolved(next)) => Some(Link::named(next.as_str())),
            Some(Link::Resolved(_)) => {
                return Err(FramingError::Clone(format!(
                    "next link of {} is already resolved",
                    scope()
                )));
            }
        };

        copy.beacts = frame.beacts.iter().map(|act| act.clone_for(target)).collect();
        copy.enacts = frame.enacts.iter().map(|act| act.clone_for(target)).collect();
        copy.renacts = frame.renacts.iter().map(|act| act.clone_for(target)).collect();
        copy.reacts = frame.reacts.iter().map(|act| act.clone_for(target)).collect();
        copy.exacts = frame.exacts.iter().map(|act| act.clone_for(target)).collect();
        copy.rexacts = frame.rexacts.iter().map(|act| act.clone_for(target)).collect();

        for preact in &frame.preacts {
            let preact = match preact {
                Preact::Act(act) => Preact::Act(act.clone_for(target)),
                Preact::Transit(transit) => {
                    let Link::Unresolved(far) = &transit.far else {
                        return Err(FramingError::Clone(format!(
                            "transition of {} is already resolved",
                            scope()
                        )));
                    };
                    Preact::Transit(Transit {
                        far: Link::named(far.as_str()),
                        needs: transit.needs.iter().map(|need| need.clone_for(target)).collect(),
                    })
                }
                Preact::Suspend(suspend) => Preact::Suspend(Suspend {
                    aux: copy_aux_link(&suspend.aux).ok_or_else(|| {
                        FramingError::Clone(format!("aux link of {} is already resolved", scope()))
                    })?,
                    needs: suspend.needs.iter().map(|need| need.clone_for(target)).collect(),
                    engaged: false,
                }),
            };
            copy.preacts.push(preact);
        }

        for aux in &frame.auxes {
            let aux = copy_aux_link(aux).ok_or_else(|| {
                FramingError::Clone(format!("aux link of {} is already resolved", scope()))
            })?;
            copy.auxes.push(aux);
        }
        Ok(copy)
    }

    /// Turn every pending clone request into a registered clone.
    ///
    /// Runs over the growing frame arena, so frames of fresh clones are
    /// visited too and nested requests are materialized in the same pass.
    pub(crate) fn materialize_moots(&mut self) -> FramingResult<()> {
        let mut tags: HashSet<(FramerId, String)> = HashSet::new();
        let mut index = 0;
        while index < self.frames.len() {
            let frame = FrameId(index);
            index += 1;

            let main = self.frames[frame.0].framer;
            let owner = &self.framers[main.0];
            if owner.resolved || owner.pruned || owner.schedule() == Schedule::Moot {
                continue;
            }

            let requests: Vec<(usize, String, MootTag)> = self.frames[frame.0]
                .aux_links()
                .enumerate()
                .filter_map(|(slot, link)| match link {
                    AuxLink::Moot { original, tag } => Some((slot, original.clone(), tag.clone())),
                    _ => None,
                })
                .collect();

            for (slot, original, tag) in requests {
                let link = self.materialize(frame, &original, &tag, &mut tags)?;
                if let Some(target) = self.frames[frame.0].aux_links_mut().nth(slot) {
                    *target = link;
                }
            }
        }
        Ok(())
    }

    fn materialize(
        &mut self,
        frame: FrameId,
        original: &str,
        tag: &MootTag,
        tags: &mut HashSet<(FramerId, String)>,
    ) -> FramingResult<AuxLink> {
        let main = self.frames[frame.0].framer;
        let main_framer = &self.framers[main.0];
        if main_framer.name() == original || main_framer.lineage.iter().any(|each| each == original) {
            let mut path = main_framer.lineage.clone();
            path.push(main_framer.name().to_string());
            path.push(original.to_string());
            return Err(FramingError::RecursiveAux {
                name: original.to_string(),
                path: path.join(" -> "),
            });
        }

        let source = self.framer_id(original).ok_or_else(|| FramingError::Resolve {
            kind: crate::error::LinkKind::Clone,
            name: original.to_string(),
            scope: self.scope(frame),
        })?;

        let (tag_text, name, insular) = match tag {
            MootTag::Insular => {
                let tag = format!("{}.{}", self.frames[frame.0].name, original);
                let name = format!("{}.{}", main_framer.name(), tag);
                (tag, name, true)
            }
            MootTag::Named(tag) => {
                if is_reserved_tag(tag) {
                    return Err(FramingError::Clone(format!(
                        "clone tag '{tag}' is reserved in {}",
                        self.scope(frame)
                    )));
                }
                (tag.clone(), tag.clone(), false)
            }
        };

        if !tags.insert((main, tag_text.clone())) {
            return Err(FramingError::Clone(format!(
                "duplicate clone tag '{tag_text}' in framer '{}'",
                main_framer.name()
            )));
        }

        // A named clone is shared by every framer that asks for it by name.
        if !insular && let Some(existing) = self.framer_id(&name) {
            let framer = &self.framers[existing.0];
            if !framer.original && framer.lineage.last().map(String::as_str) == Some(original) {
                return Ok(AuxLink::Materialized {
                    original: original.to_string(),
                    tag: tag.clone(),
                    name,
                });
            }
        }

        let clone = self.clone_framer(source, &name, Some(&tag_text), insular)?;
        if insular {
            self.framers[clone.0].main = Some(frame);
        }
        Ok(AuxLink::Materialized {
            original: original.to_string(),
            tag: tag.clone(),
            name,
        })
    }
}

/// Copy an aux link for a clone. Materialized requests become requests again.
fn copy_aux_link(link: &AuxLink) -> Option<AuxLink> {
    match link {
        AuxLink::Named(name) => Some(AuxLink::Named(name.clone())),
        AuxLink::Moot { original, tag } | AuxLink::Materialized { original, tag, .. } => {
            Some(AuxLink::Moot {
                original: original.clone(),
                tag: tag.clone(),
            })
        }
        AuxLink::Resolved(_) => None,
    }
}
