use bitflags::bitflags;

bitflags! {
    /// Matching flags shared by every node of one match attempt.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u8 {
        /// Compare characters after uppercase folding.
        const IGNORE_CASE = 1;
        /// `^` and `$` also match at line terminators; `.` stops matching them.
        const MULTILINE = 2;
    }
}

impl Flags {
    pub fn ignore_case(self) -> bool {
        self.contains(Flags::IGNORE_CASE)
    }

    pub fn multiline(self) -> bool {
        self.contains(Flags::MULTILINE)
    }
}
