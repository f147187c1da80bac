use std::fmt;

use kinema_core::FormatError;

use crate::motion::MotionFile;

/// Display adapter producing motion-file text for a [`MotionFile`].
///
/// Rotations are converted back from degrees to radians. Names are quoted
/// unless they contain a `"`, in which case they are written bare; names
/// that fit neither form are written as-is, so check them with
/// [`write_motion`] first.
pub struct MotionText<'a>(pub &'a MotionFile);

impl fmt::Display for MotionText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let motion = self.0;

        writeln!(f, "version {}", motion.version)?;
        writeln!(f, "// name: {}", motion.name)?;

        writeln!(f, "nodes")?;
        for bone in &motion.bones {
            if bone.name.contains('"') {
                writeln!(f, "  {} {} {}", bone.id, bone.name, bone.parent_id)?;
            } else {
                writeln!(f, "  {} \"{}\" {}", bone.id, bone.name, bone.parent_id)?;
            }
        }
        writeln!(f, "end")?;

        writeln!(f, "skeleton")?;
        for frame in &motion.frames {
            writeln!(f, "  time {}", frame.time)?;
            for s in &frame.samples {
                writeln!(
                    f,
                    "    {} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
                    s.bone_id,
                    s.position.x,
                    s.position.y,
                    s.position.z,
                    s.rotation.x.to_radians(),
                    s.rotation.y.to_radians(),
                    s.rotation.z.to_radians(),
                )?;
            }
        }
        writeln!(f, "end")
    }
}

/// A quoted token ends at the next `"` and a bare one at whitespace, so a
/// name needs either no quote or no whitespace (and no leading quote).
fn is_writable(name: &str) -> bool {
    !name.contains('"') || !(name.starts_with('"') || name.contains(char::is_whitespace))
}

/// Serializes a motion back into the text format existing motion
/// libraries read.
pub fn write_motion(motion: &MotionFile) -> Result<String, FormatError> {
    if let Some(bone) = motion.bones.iter().find(|b| !is_writable(&b.name)) {
        return Err(FormatError::UnwritableName {
            id: bone.id,
            name: bone.name.clone(),
        });
    }
    Ok(MotionText(motion).to_string())
}
