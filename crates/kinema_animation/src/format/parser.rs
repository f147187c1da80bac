//! Line-oriented motion-file parser.
//!
//! The scan is a small state machine over three sections (`None`, `Nodes`,
//! `Skeleton`). Rotations are read as radians and stored as degrees.

use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use kinema_core::FormatError;

use crate::motion::{BoneDeclaration, BoneSample, Frame, MotionFile, ROOT_PARENT};

/// Name used when the file carries no `// name:` comment.
pub const DEFAULT_MOTION_NAME: &str = "motion";
/// Version used when the file has no readable `version` line.
pub const DEFAULT_VERSION: u32 = 1;

const NODE_TOKENS: usize = 3;
const SAMPLE_TOKENS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Nodes,
    Skeleton,
}

impl Section {
    fn keyword(self) -> &'static str {
        match self {
            Section::None => "",
            Section::Nodes => "nodes",
            Section::Skeleton => "skeleton",
        }
    }
}

/// Parses motion-file text.
///
/// Missing name and version are substituted with defaults; everything
/// structural (missing sections, truncated lines, broken hierarchy) is a
/// [`FormatError`].
pub fn parse_motion(text: &str) -> Result<MotionFile, FormatError> {
    let mut parser = Parser::default();
    for (index, raw) in text.lines().enumerate() {
        parser.feed(index + 1, raw.trim())?;
    }
    let motion = parser.finish()?;

    log::info!(
        "Parsed motion '{}' (version {}): {} bones, {} frames",
        motion.name,
        motion.version,
        motion.bones.len(),
        motion.frames.len()
    );
    Ok(motion)
}

struct Parser {
    section: Section,
    section_line: usize,
    saw_nodes: bool,
    saw_skeleton: bool,

    name: Option<String>,
    version: Option<u32>,

    bones: Vec<BoneDeclaration>,
    bone_ids: FxHashSet<i32>,
    frames: Vec<Frame>,
    current: Option<Frame>,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            section: Section::None,
            section_line: 0,
            saw_nodes: false,
            saw_skeleton: false,
            name: None,
            version: None,
            bones: Vec::new(),
            bone_ids: FxHashSet::default(),
            frames: Vec::new(),
            current: None,
        }
    }
}

impl Parser {
    fn feed(&mut self, line_no: usize, line: &str) -> Result<(), FormatError> {
        if line.is_empty() {
            return Ok(());
        }
        if let Some(comment) = line.strip_prefix("//") {
            if self.name.is_none()
                && let Some(name) = comment.trim().strip_prefix("name:")
            {
                let name = name.trim();
                if !name.is_empty() {
                    self.name = Some(name.to_string());
                }
            }
            return Ok(());
        }
        if line.starts_with('#') || line.starts_with(';') {
            return Ok(());
        }

        let tokens = tokenize(line);

        if tokens[0] == "end" && self.section != Section::None {
            self.close_section();
            return Ok(());
        }

        match self.section {
            Section::None => self.feed_top_level(line_no, line, &tokens),
            Section::Nodes => self.feed_node(line_no, &tokens),
            Section::Skeleton => self.feed_skeleton(line_no, &tokens),
        }
    }

    fn feed_top_level(&mut self, line_no: usize, line: &str, tokens: &[&str]) -> Result<(), FormatError> {
        match tokens[0] {
            "version" => {
                self.version = tokens.get(1).and_then(|t| t.parse().ok());
                if self.version.is_none() {
                    log::warn!("Line {line_no}: unreadable version, using {DEFAULT_VERSION}");
                }
                Ok(())
            }
            "nodes" => {
                self.open_section(Section::Nodes, line_no);
                self.saw_nodes = true;
                Ok(())
            }
            "skeleton" => {
                self.open_section(Section::Skeleton, line_no);
                self.saw_skeleton = true;
                Ok(())
            }
            "time" => Err(FormatError::TimeOutsideSkeleton { line: line_no }),
            _ => Err(FormatError::UnexpectedLine {
                line: line_no,
                content: line.to_string(),
            }),
        }
    }

    fn feed_node(&mut self, line_no: usize, tokens: &[&str]) -> Result<(), FormatError> {
        if tokens.len() < NODE_TOKENS {
            return Err(FormatError::TruncatedLine {
                line: line_no,
                expected: NODE_TOKENS,
                found: tokens.len(),
            });
        }
        let id: i32 = parse_number(line_no, tokens[0])?;
        let parent_id: i32 = parse_number(line_no, tokens[2])?;

        if !self.bone_ids.insert(id) {
            return Err(FormatError::DuplicateBone { line: line_no, id });
        }
        self.bones.push(BoneDeclaration {
            id,
            name: tokens[1].to_string(),
            parent_id,
        });
        Ok(())
    }

    fn feed_skeleton(&mut self, line_no: usize, tokens: &[&str]) -> Result<(), FormatError> {
        if tokens[0] == "time" {
            let Some(token) = tokens.get(1) else {
                return Err(FormatError::TruncatedLine {
                    line: line_no,
                    expected: 2,
                    found: tokens.len(),
                });
            };
            let time: u32 = parse_number(line_no, token)?;
            self.push_current_frame();
            if let Some(previous) = self.frames.last().map(|f| f.time)
                && time <= previous
            {
                return Err(FormatError::NonIncreasingTime {
                    line: line_no,
                    time,
                    previous,
                });
            }
            self.current = Some(Frame {
                time,
                samples: Vec::new(),
            });
            return Ok(());
        }

        if tokens.len() < SAMPLE_TOKENS {
            return Err(FormatError::TruncatedLine {
                line: line_no,
                expected: SAMPLE_TOKENS,
                found: tokens.len(),
            });
        }

        let bone_id: i32 = parse_number(line_no, tokens[0])?;
        let mut values = [0.0_f32; 6];
        for (value, token) in values.iter_mut().zip(&tokens[1..SAMPLE_TOKENS]) {
            *value = parse_number(line_no, token)?;
        }

        if !self.bone_ids.contains(&bone_id) {
            return Err(FormatError::UnknownBone { line: line_no, id: bone_id });
        }
        let Some(frame) = self.current.as_mut() else {
            return Err(FormatError::SampleOutsideFrame { line: line_no });
        };

        let sample = BoneSample {
            bone_id,
            position: Vec3::new(values[0], values[1], values[2]),
            rotation: Vec3::new(values[3].to_degrees(), values[4].to_degrees(), values[5].to_degrees()),
        };

        if let Some(existing) = frame.samples.iter_mut().find(|s| s.bone_id == bone_id) {
            log::warn!("Line {line_no}: bone {bone_id} sampled twice in frame {}, keeping the later sample", frame.time);
            *existing = sample;
        } else {
            frame.samples.push(sample);
        }
        Ok(())
    }

    fn open_section(&mut self, section: Section, line_no: usize) {
        self.section = section;
        self.section_line = line_no;
    }

    fn close_section(&mut self) {
        if self.section == Section::Skeleton {
            self.push_current_frame();
        }
        self.section = Section::None;
    }

    fn push_current_frame(&mut self) {
        if let Some(frame) = self.current.take() {
            self.frames.push(frame);
        }
    }

    fn finish(self) -> Result<MotionFile, FormatError> {
        if self.section != Section::None {
            return Err(FormatError::UnterminatedSection {
                section: self.section.keyword(),
                line: self.section_line,
            });
        }
        if !self.saw_nodes {
            return Err(FormatError::MissingSection("nodes"));
        }
        if !self.saw_skeleton {
            return Err(FormatError::MissingSection("skeleton"));
        }

        validate_hierarchy(&self.bones)?;

        Ok(MotionFile {
            name: self.name.unwrap_or_else(|| DEFAULT_MOTION_NAME.to_string()),
            version: self.version.unwrap_or(DEFAULT_VERSION),
            bones: self.bones,
            frames: self.frames,
        })
    }
}

/// Every parent must be declared and the parent links must form a forest.
fn validate_hierarchy(bones: &[BoneDeclaration]) -> Result<(), FormatError> {
    let parents: FxHashMap<i32, i32> = bones.iter().map(|b| (b.id, b.parent_id)).collect();

    for bone in bones {
        if bone.parent_id != ROOT_PARENT && !parents.contains_key(&bone.parent_id) {
            return Err(FormatError::UnknownParent {
                id: bone.id,
                parent_id: bone.parent_id,
            });
        }

        // A chain longer than the bone count must revisit a bone
        let mut current = bone.parent_id;
        let mut steps = 0;
        while current != ROOT_PARENT {
            steps += 1;
            if steps > bones.len() {
                return Err(FormatError::ParentCycle { id: bone.id });
            }
            current = parents.get(&current).copied().unwrap_or(ROOT_PARENT);
        }
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(line: usize, token: &str) -> Result<T, FormatError> {
    token.parse().map_err(|_| FormatError::InvalidNumber {
        line,
        token: token.to_string(),
    })
}

/// Splits on whitespace, keeping `"quoted names"` as single tokens
/// (quotes stripped).
fn tokenize(line: &str) -> SmallVec<[&str; 8]> {
    let mut tokens = SmallVec::new();
    let mut rest = line.trim_start();

    while !rest.is_empty() {
        if let Some(quoted) = rest.strip_prefix('"') {
            let end = quoted.find('"').unwrap_or(quoted.len());
            tokens.push(&quoted[..end]);
            rest = quoted.get(end + 1..).unwrap_or("");
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            tokens.push(&rest[..end]);
            rest = &rest[end..];
        }
        rest = rest.trim_start();
    }
    tokens
}
