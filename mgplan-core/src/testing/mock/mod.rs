mod mock_state_space;

pub use mock_state_space::BoxStateSpace;
