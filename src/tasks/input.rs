use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ConfigPatch;
use crate::events::{Key, Slide, Stimulus};

/// Parse one host command line. Blank lines and `#` comments yield `None`.
///
/// ```text
/// next | prev | goto <index> | key <name>
/// down <pos> | move <pos> | up
/// hover | leave | focus | blur | pause | resume | tick
/// set <field>=<value> [<field>=<value> ...]
/// slides <label>[, <label> ...] | clear
/// ```
pub fn parse_command(line: &str) -> Result<Option<Stimulus>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let stimulus = match verb.to_ascii_lowercase().as_str() {
        "next" => Stimulus::Next,
        "prev" => Stimulus::Prev,
        "goto" => Stimulus::GoTo(
            rest.parse()
                .with_context(|| format!("goto expects a slide index, got {rest:?}"))?,
        ),
        "key" => Stimulus::Key(Key::from_name(rest)),
        "down" => Stimulus::PointerDown(parse_pos(rest)?),
        "move" => Stimulus::PointerMove(parse_pos(rest)?),
        "up" => Stimulus::PointerUp,
        "hover" => Stimulus::HoverEnter,
        "leave" => Stimulus::HoverLeave,
        "focus" => Stimulus::Focus,
        "blur" => Stimulus::Blur,
        "pause" => Stimulus::Pause,
        "resume" => Stimulus::Resume,
        "tick" => Stimulus::Tick,
        "set" => Stimulus::Reconfigure(parse_patch(rest)?),
        "slides" => Stimulus::ReplaceSlides(
            rest.split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(|label| Slide::new(label, ""))
                .collect(),
        ),
        "clear" => Stimulus::ReplaceSlides(Vec::new()),
        other => bail!("unknown command {other:?}"),
    };
    Ok(Some(stimulus))
}

fn parse_pos(raw: &str) -> Result<f32> {
    raw.parse()
        .with_context(|| format!("expected a pointer position, got {raw:?}"))
}

/// `interval-ms=2000 loop=false` becomes the equivalent YAML mapping, so the
/// patch goes through the same field names and checks as the config file.
fn parse_patch(rest: &str) -> Result<ConfigPatch> {
    let mut yaml = String::new();
    for pair in rest.split_whitespace() {
        let Some((field, value)) = pair.split_once('=') else {
            bail!("expected <field>=<value>, got {pair:?}");
        };
        yaml.push_str(field);
        yaml.push_str(": ");
        yaml.push_str(value);
        yaml.push('\n');
    }
    if yaml.is_empty() {
        bail!("set expects at least one <field>=<value>");
    }
    serde_yaml::from_str(&yaml).context("invalid configuration update")
}

/// Forward parsed commands from `reader` until EOF or cancellation. Lines that
/// fail to parse are logged and skipped.
pub async fn run<R>(
    reader: R,
    to_carousel: Sender<Stimulus>,
    cancel: CancellationToken,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        let line = select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line.context("failed to read host input")?,
        };
        let Some(line) = line else {
            debug!("host input closed");
            break;
        };
        match parse_command(&line) {
            Ok(Some(stimulus)) => {
                if to_carousel.send(stimulus).await.is_err() {
                    warn!("carousel channel closed");
                    break;
                }
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, line = %line, "ignoring host command"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation_commands() {
        assert_eq!(parse_command("next").unwrap(), Some(Stimulus::Next));
        assert_eq!(parse_command("  PREV ").unwrap(), Some(Stimulus::Prev));
        assert_eq!(parse_command("goto 3").unwrap(), Some(Stimulus::GoTo(3)));
        assert_eq!(
            parse_command("key Home").unwrap(),
            Some(Stimulus::Key(Key::Home))
        );
    }

    #[test]
    fn parses_pointer_commands() {
        assert_eq!(
            parse_command("down 200").unwrap(),
            Some(Stimulus::PointerDown(200.0))
        );
        assert_eq!(
            parse_command("move 140.5").unwrap(),
            Some(Stimulus::PointerMove(140.5))
        );
        assert_eq!(parse_command("up").unwrap(), Some(Stimulus::PointerUp));
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse_command("").unwrap(), None);
        assert_eq!(parse_command("# swipe test").unwrap(), None);
    }

    #[test]
    fn set_builds_config_patch() {
        let Some(Stimulus::Reconfigure(patch)) =
            parse_command("set interval-ms=2000 loop=false").unwrap()
        else {
            panic!("expected reconfigure");
        };
        assert_eq!(patch.interval_ms, Some(2000));
        assert_eq!(patch.looping, Some(false));
        assert_eq!(patch.preload_radius, None);
    }

    #[test]
    fn set_passes_negative_numbers_through_for_engine_to_reject() {
        let Some(Stimulus::Reconfigure(patch)) = parse_command("set preload-radius=-2").unwrap()
        else {
            panic!("expected reconfigure");
        };
        assert_eq!(patch.preload_radius, Some(-2));
    }

    #[test]
    fn slides_command_builds_list() {
        let Some(Stimulus::ReplaceSlides(slides)) =
            parse_command("slides Harbour, Lighthouse ,Dunes").unwrap()
        else {
            panic!("expected slide replacement");
        };
        let labels: Vec<_> = slides.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["Harbour", "Lighthouse", "Dunes"]);
        assert_eq!(
            parse_command("clear").unwrap(),
            Some(Stimulus::ReplaceSlides(Vec::new()))
        );
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!(parse_command("goto first").is_err());
        assert!(parse_command("down").is_err());
        assert!(parse_command("set interval-ms").is_err());
        assert!(parse_command("set bogus-field=1").is_err());
        assert!(parse_command("jump").is_err());
    }

    #[tokio::test]
    async fn run_forwards_until_eof() {
        let input: &[u8] = b"next\n\nbogus\nhover\n";
        let (tx, mut rx) = tokio::sync::mpsc::channel(8);
        run(input, tx, CancellationToken::new())
            .await
            .expect("reader task");
        assert_eq!(rx.recv().await, Some(Stimulus::Next));
        assert_eq!(rx.recv().await, Some(Stimulus::HoverEnter));
        assert_eq!(rx.recv().await, None);
    }
}
