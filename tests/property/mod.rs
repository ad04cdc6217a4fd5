mod parsing;
mod routing;
