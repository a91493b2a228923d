use hashbrown::HashSet;

/// Scratch set of attribute names, reused across element updates so that its allocation is kept.
pub struct TempNameSet(HashSet<&'static str>);
impl TempNameSet {
	pub fn new() -> Self {
		Self(HashSet::new())
	}

	pub fn temp<'a>(&mut self) -> &mut HashSet<&'a str> {
		unsafe {
			//SAFETY: The collection is cleared before each borrow, so no names can leak between them.
			// Stale entries left behind after a borrow are never read, only dropped by the next `clear`.
			self.0.clear();
			&mut *(&mut self.0 as *mut HashSet<&'static str>).cast()
		}
	}

	/// Retrieves the cache set's capacity without clearing it first.
	pub fn capacity(&self) -> usize {
		self.0.capacity()
	}
}
