//! Line commands accepted by `cliploop play`.

use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Next,
    Back,
    Hold,
    Release,
    Whole,
    Pause,
    Resume,
    Folder(String),
    File(String),
    Root,
    /// `None` lets the backend pick.
    Duration(Option<u32>),
    Queue,
    History,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  next | n              skip to the next clip
  back | b              replay the previous clip
  hold                  keep replaying the current clip
  release               resume looping after hold or whole
  whole                 play the current file from the start
  pause | resume
  folder <path>         loop clips from a folder
  file <path>           loop sub-clips of one file
  root                  loop clips from the whole library
  duration <n|random>   preferred clip length in seconds
  queue | history | status
  quit | q";

impl FromStr for ReplCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "next" | "n" => Self::Next,
            "back" | "b" => Self::Back,
            "hold" => Self::Hold,
            "release" => Self::Release,
            "whole" => Self::Whole,
            "pause" => Self::Pause,
            "resume" => Self::Resume,
            "folder" => Self::Folder(required(word, rest)?),
            "file" => Self::File(required(word, rest)?),
            "root" => Self::Root,
            "duration" => match rest {
                "random" | "" => Self::Duration(None),
                n => Self::Duration(Some(
                    n.parse()
                        .map_err(|_| format!("duration must be a whole number of seconds, got '{n}'"))?,
                )),
            },
            "queue" => Self::Queue,
            "history" => Self::History,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => return Err(format!("unknown command '{other}' (try 'help')")),
        };
        Ok(command)
    }
}

fn required(word: &str, rest: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("'{word}' needs a path"))
    } else {
        Ok(rest.to_string())
    }
}
