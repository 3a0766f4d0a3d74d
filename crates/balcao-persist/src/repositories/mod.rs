mod customer;
mod thread;

pub use customer::CustomerRepository;
pub use thread::ThreadRepository;
