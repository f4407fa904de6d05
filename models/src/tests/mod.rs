mod autocomplete;
mod severity;
