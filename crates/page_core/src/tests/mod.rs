mod classes_tests;
mod dispatch_tests;
mod nav_tests;
