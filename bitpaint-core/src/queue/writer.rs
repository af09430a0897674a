use crate::commands::{CanvasCommand, Command};
use crate::state::canvas::Canvas;

/// Any type which can sink commands.
pub trait CommandWrite<Command> {
    /// Inserts a command.
    fn write(&mut self, command: Command);
}
impl<Write, Command> CommandWrite<Command> for &mut Write
where
    Write: CommandWrite<Command>,
{
    fn write(&mut self, command: Command) {
        (**self).write(command);
    }
}

/// Collects the canvas commands of one user-level operation. See [`super::History::write_with`].
pub struct CommandWriter<'a> {
    pub(super) history: &'a mut super::History,
    // Optimize for exactly one command (the most common case)
    pub(super) commands: smallvec::SmallVec<[CanvasCommand; 1]>,
}
impl Drop for CommandWriter<'_> {
    fn drop(&mut self) {
        if self.commands.is_empty() {
            return;
        }
        // Half an operation is worse than none.
        if std::thread::panicking() {
            log::warn!(
                "Discarding {} commands written before a panic",
                self.commands.len()
            );
            return;
        }
        // We always queue exactly one change - bundle into an atomic group if more!
        let command = if self.commands.len() == 1 {
            match self.commands.pop() {
                Some(command) => Command::Canvas(command),
                None => return,
            }
        } else {
            Command::atomic(std::mem::take(&mut self.commands).into_vec())
        };
        log::trace!("Writing new command: {:#?}", command);
        self.history.enqueue(command);
    }
}
impl CommandWriter<'_> {
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.commands.is_empty()
    }
    /// The canvas as of the last handled change. Commands written so far are not reflected.
    #[must_use]
    pub fn canvas(&self) -> &Canvas {
        self.history.canvas()
    }
}
impl<Subcommand: Into<CanvasCommand>> CommandWrite<Subcommand> for CommandWriter<'_> {
    fn write(&mut self, command: Subcommand) {
        CommandWrite::write(&mut self.commands, command);
    }
}

// Any subcommand that can be wrapped in a canvas command can be written into any
// smallvec of them.
impl<Subcommand, Array> CommandWrite<Subcommand> for smallvec::SmallVec<Array>
where
    Subcommand: Into<CanvasCommand>,
    Array: smallvec::Array<Item = CanvasCommand>,
{
    fn write(&mut self, command: Subcommand) {
        self.push(command.into());
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::commands::AnyCommand;
    use crate::io::storage::MemoryStorage;
    use crate::queue::History;

    struct NoEncoder;
    impl crate::io::GridEncoder for NoEncoder {
        fn encode(
            &self,
            file_type: &str,
            _: &crate::grid::Grid<crate::color::Color>,
        ) -> Result<Vec<u8>, crate::io::EncodeError> {
            Err(crate::io::EncodeError::UnsupportedType(file_type.to_owned()))
        }
    }
    fn add_layer(name: &str) -> CanvasCommand {
        CanvasCommand::AddLayer {
            name: Some(name.into()),
        }
    }

    #[test]
    fn single_command_is_not_grouped() {
        let mut history = History::new(MemoryStorage::new(), NoEncoder);
        let changed = history.write_with(|writer| {
            writer.write(add_layer("a"));
            writer.changed()
        });
        assert!(changed);
        history.handle_changes().unwrap();
        assert!(history.applied()[0].command.canvas().is_some());
    }
    #[test]
    fn several_commands_are_atomic() {
        let mut history = History::new(MemoryStorage::new(), NoEncoder);
        history.write_with(|writer| {
            assert!(writer.canvas().layers().is_empty());
            writer.write(add_layer("a"));
            writer.write(add_layer("b"));
        });
        assert_eq!(history.queued_changes(), 1);
        history.handle_changes().unwrap();
        let Some(AnyCommand::Atomic { commands }) = history.applied()[0].command.any() else {
            panic!("expected an atomic group");
        };
        assert_eq!(commands.len(), 2);
        assert_eq!(history.canvas().layers().len(), 2);
    }
    #[test]
    fn nothing_written() {
        let mut history = History::new(MemoryStorage::new(), NoEncoder);
        history.write_with(|_| ());
        assert_eq!(history.queued_changes(), 0);
    }
    #[test]
    fn history_is_a_sink() {
        fn draw(mut sink: impl CommandWrite<Command>) {
            sink.write(Command::Canvas(add_layer("x")));
        }
        let mut history = History::new(MemoryStorage::new(), NoEncoder);
        draw(&mut history);
        assert_eq!(history.queued_changes(), 1);
    }
}
