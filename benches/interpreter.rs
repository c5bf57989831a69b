use criterion::{Criterion, black_box, criterion_group, criterion_main};
use itmoscript::{Interpreter, lexer, parser};

const WORKLOADS: [(&str, &str); 3] = [
    (
        "fib",
        "fib = function(n)\n\
         if n < 2 then return n end if\n\
         return fib(n - 1) + fib(n - 2)\n\
         end function\n\
         print(fib(15))\n",
    ),
    (
        "list_churn",
        "l = []\n\
         for i in range(200)\n\
         push(l, i)\n\
         end for\n\
         sort(l)\n\
         total = 0\n\
         for x in l[::2]\n\
         total += x\n\
         end for\n\
         print(total)\n",
    ),
    (
        "strings",
        "parts = split(\"a,b,c,d,e,f,g,h\" * 20, \",\")\n\
         out = []\n\
         for p in parts\n\
         push(out, upper(p))\n\
         end for\n\
         print(len(join(out, \"-\")))\n",
    ),
];

fn bench_interpreter(c: &mut Criterion) {
    for (label, source) in WORKLOADS {
        let tokens = lexer::tokenize(source).expect("tokenize");
        let program = parser::parse_tokens(tokens).expect("parse");

        c.bench_function(&format!("frontend_tokenize_{label}"), |b| {
            b.iter(|| {
                let tokens = lexer::tokenize(black_box(source)).expect("tokenize");
                black_box(tokens);
            })
        });

        c.bench_function(&format!("frontend_parse_{label}"), |b| {
            b.iter(|| {
                let tokens = lexer::tokenize(black_box(source)).expect("tokenize");
                let program = parser::parse_tokens(tokens).expect("parse");
                black_box(program);
            })
        });

        c.bench_function(&format!("interpreter_run_{label}"), |b| {
            b.iter(|| {
                let mut interpreter = Interpreter::new();
                interpreter.run(black_box(&program)).expect("run");
                black_box(interpreter.into_output());
            })
        });

        c.bench_function(&format!("full_pipeline_{label}"), |b| {
            b.iter(|| {
                let tokens = lexer::tokenize(black_box(source)).expect("tokenize");
                let parsed = parser::parse_tokens(tokens).expect("parse");
                let mut interpreter = Interpreter::new();
                interpreter.run(&parsed).expect("run");
                black_box(interpreter.into_output());
            })
        });
    }
}

criterion_group!(benches, bench_interpreter);
criterion_main!(benches);
