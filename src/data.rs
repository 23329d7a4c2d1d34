use std::ops::Deref;

use indexmap::IndexMap;
use itertools::Itertools;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::status::Status;
use crate::tags::{COMMENT_START, ID};
use crate::XmlTree;

/// XML attributes in document order
pub type XmlAttr = IndexMap<String, String>;

/// Event weights, keyed by the weight id
pub type Weights = IndexMap<String, f64>;

/// First line of the `<init>` block: beams, PDFs and weighting strategy
///
/// See <https://arxiv.org/abs/hep-ph/0109068v1> for details on the fields.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct InitInfo {
    /// PDG ID of beam A
    pub beam_a: i32,
    /// PDG ID of beam B
    pub beam_b: i32,
    /// Energy of beam A in GeV
    pub energy_a: f64,
    /// Energy of beam B in GeV
    pub energy_b: f64,
    /// PDF group of beam A
    pub pdf_group_a: i32,
    /// PDF group of beam B
    pub pdf_group_b: i32,
    /// PDF set of beam A
    pub pdf_set_a: i32,
    /// PDF set of beam B
    pub pdf_set_b: i32,
    /// Event weighting strategy (IDWTUP)
    pub weighting_strategy: i32,
    /// Number of subprocesses
    pub num_processes: i32,
}

/// Subprocess line of the `<init>` block
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct ProcInfo {
    /// Cross section
    pub x_section: f64,
    /// Cross section error
    pub error: f64,
    /// Maximum weight
    pub unit_weight: f64,
    /// Process ID
    pub proc_id: i32,
}

/// A single weight declared in `<initrwgt>`
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone)]
pub struct WeightInfo {
    /// Attributes in `<weight>` tag, including the `id`
    pub attributes: XmlAttr,
    /// Description text
    pub name: String,
    /// Position in the positional `<weights>` list
    pub index: usize,
}

impl WeightInfo {
    pub fn id(&self) -> Option<&str> {
        self.attributes.get(ID).map(String::as_str)
    }
}

/// A `<weightgroup>`, e.g. scale or PDF variations
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone, Default)]
pub struct WeightGroup {
    /// Attributes in `<weightgroup>` tag
    pub attributes: XmlAttr,
    /// Weights by id, in declaration order
    pub weights: IndexMap<String, WeightInfo>,
}

impl WeightGroup {
    /// The `type` attribute, or `name` if there is no `type`
    pub fn key(&self) -> Option<&str> {
        group_key(&self.attributes)
    }

    /// An empty group keyed by its `type` or `name` attribute
    pub(crate) fn from_attributes(attributes: XmlAttr) -> Option<(String, Self)> {
        let key = group_key(&attributes)?.to_owned();
        Some((
            key,
            Self {
                attributes,
                weights: IndexMap::new(),
            },
        ))
    }
}

pub(crate) fn group_key(attributes: &XmlAttr) -> Option<&str> {
    attributes
        .get("type")
        .or_else(|| attributes.get("name"))
        .map(String::as_str)
}

/// Run information from the `<init>` block
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone)]
pub struct Init {
    /// Beam and PDF information
    pub info: InitInfo,
    /// Subprocess information
    pub processes: Vec<ProcInfo>,
    /// Weight groups by their `type` or `name`
    pub weight_groups: IndexMap<String, WeightGroup>,
    /// LHEF version from the `<LesHouchesEvents>` tag
    pub version: String,
}

impl Init {
    /// Weight information for the given id, searching all groups
    pub fn weight(&self, id: &str) -> Option<&WeightInfo> {
        self.weight_groups.values().find_map(|g| g.weights.get(id))
    }
}

/// First line of an `<event>` block
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct EventInfo {
    /// Number of particles
    pub nparticles: i32,
    /// Process ID
    pub pid: i32,
    /// Event weight
    pub weight: f64,
    /// Scale in GeV
    pub scale: f64,
    /// Value of the QED coupling α
    pub aqed: f64,
    /// Value of the QCD coupling α_s
    pub aqcd: f64,
}

/// A particle line of an `<event>` block
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Particle {
    /// PDG ID
    pub id: i32,
    /// Status code, see [Status]
    pub status: i32,
    /// 1-based index of the first mother, 0 if there is none
    pub mother1: i32,
    /// 1-based index of the second mother, 0 if there is none
    pub mother2: i32,
    /// First colour line
    pub color1: i32,
    /// Second colour line
    pub color2: i32,
    /// Momentum in GeV
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    /// Energy in GeV
    pub e: f64,
    /// Mass in GeV
    pub m: f64,
    /// Lifetime in mm
    pub lifetime: f64,
    /// Spin angle
    pub spin: f64,
}

impl Particle {
    pub fn status_kind(&self) -> Status {
        Status::from(self.status)
    }
}

/// A single event
///
/// The event owns its particles. Mother and daughter relations are resolved
/// through [ParticleRef], a view of a particle together with its event.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Clone)]
pub struct Event {
    info: EventInfo,
    particles: Vec<Particle>,
    weights: Weights,
    attributes: XmlAttr,
    comments: Vec<String>,
}

impl Event {
    pub fn new(info: EventInfo, particles: Vec<Particle>) -> Self {
        Self {
            info,
            particles,
            weights: Weights::new(),
            attributes: XmlAttr::new(),
            comments: Vec::new(),
        }
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_attributes(mut self, attributes: XmlAttr) -> Self {
        self.attributes = attributes;
        self
    }

    /// Add `#` comment lines
    ///
    /// Each line of each comment becomes one comment line. Surrounding
    /// whitespace is trimmed, blank lines are dropped and a `#` is prepended
    /// where it is missing.
    pub fn with_comments(mut self, comments: Vec<String>) -> Self {
        self.comments = comments
            .iter()
            .flat_map(|comment| comment.lines())
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                if line.starts_with(COMMENT_START) {
                    line.to_owned()
                } else {
                    format!("{COMMENT_START}{line}")
                }
            })
            .collect();
        self
    }

    pub fn info(&self) -> &EventInfo {
        &self.info
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// The particle at the 0-based `index`
    pub fn particle(&self, index: usize) -> Option<ParticleRef<'_>> {
        (index < self.particles.len()).then_some(ParticleRef { event: self, index })
    }

    pub fn iter(&self) -> impl Iterator<Item = ParticleRef<'_>> + '_ {
        (0..self.particles.len()).map(move |index| ParticleRef { event: self, index })
    }

    /// Outgoing final-state particles
    pub fn final_state(&self) -> impl Iterator<Item = ParticleRef<'_>> + '_ {
        self.iter()
            .filter(|p| p.status_kind() == Status::Outgoing)
    }

    /// Weights by id, empty if the event has none
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Attributes in `<event>` tag
    pub fn attributes(&self) -> &XmlAttr {
        &self.attributes
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }
}

/// A particle borrowed together with the event it belongs to
#[derive(Copy, Clone, Debug)]
pub struct ParticleRef<'a> {
    event: &'a Event,
    index: usize,
}

impl<'a> ParticleRef<'a> {
    /// 0-based position in the event
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn event(&self) -> &'a Event {
        self.event
    }

    pub fn particle(&self) -> &'a Particle {
        &self.event.particles[self.index]
    }

    /// The distinct mothers of this particle
    ///
    /// Mother indices of 0 and indices outside the event are skipped.
    pub fn mothers(&self) -> Vec<ParticleRef<'a>> {
        let p = self.particle();
        [p.mother1, p.mother2]
            .into_iter()
            .filter(|&m| m > 0)
            .unique()
            .filter_map(|m| self.event.particle(m as usize - 1))
            .collect()
    }

    /// All particles that list this particle as a mother
    pub fn daughters(&self) -> Vec<ParticleRef<'a>> {
        let own = self.index as i32 + 1;
        self.event
            .iter()
            .filter(|d| d.mother1 == own || d.mother2 == own)
            .collect()
    }
}

impl<'a> Deref for ParticleRef<'a> {
    type Target = Particle;

    fn deref(&self) -> &Particle {
        self.particle()
    }
}

impl PartialEq for ParticleRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.event, other.event) && self.index == other.index
    }
}

/// A complete LHE file
#[derive(PartialEq, Debug, Clone)]
pub struct LheFile {
    /// Optional `<header>` block, without any `<initrwgt>`
    pub header: Option<XmlTree>,
    pub init: Init,
    pub events: Vec<Event>,
}

impl LheFile {
    pub fn new(init: Init, events: Vec<Event>) -> Self {
        Self {
            header: None,
            init,
            events,
        }
    }
}
