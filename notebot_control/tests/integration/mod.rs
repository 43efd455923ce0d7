mod autonomous_legs;
mod config_load;
mod note_lifecycle;
