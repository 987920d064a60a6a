// Command-line modes of the `draftline` binary.

use std::path::PathBuf;

use anyhow::bail;

pub const USAGE: &str = "usage: draftline <draft.json> [champion ...]\n       \
                         draftline simulate <draft.json>\n       \
                         draftline replay <draft.json>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Commit `commits` in order, then report on the next step.
    Report { draft: PathBuf, commits: Vec<String> },
    /// Play the draft out with the engine's top choice at every step.
    Simulate { draft: PathBuf },
    /// Rank every recorded action against the engine.
    Replay { draft: PathBuf },
}

impl Command {
    /// Parse arguments, program name excluded.
    pub fn parse<I>(args: I) -> anyhow::Result<Command>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let Some(first) = args.next() else {
            bail!("{USAGE}");
        };
        let rest: Vec<String> = args.collect();

        match first.as_str() {
            "simulate" | "replay" => {
                let [draft] = rest.as_slice() else {
                    bail!("{USAGE}");
                };
                let draft = PathBuf::from(draft);
                Ok(if first == "simulate" {
                    Command::Simulate { draft }
                } else {
                    Command::Replay { draft }
                })
            }
            _ => Ok(Command::Report {
                draft: PathBuf::from(first),
                commits: rest,
            }),
        }
    }

    pub fn draft(&self) -> &PathBuf {
        match self {
            Command::Report { draft, .. } | Command::Simulate { draft } | Command::Replay { draft } => {
                draft
            }
        }
    }
}
