/// Uses an associated type so each implementation can define its own
/// instant representation.
pub trait GetNow {
    type Instant: Copy;

    fn now(&self) -> Self::Instant;
}
